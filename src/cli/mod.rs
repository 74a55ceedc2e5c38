pub mod commands;
pub mod ui;
pub mod util;

pub use commands::generate::GenerateOptions;
pub use commands::scan::ScanOptions;
pub use ui::Output;
pub use util::CommandContext;
