//! Command implementations

pub mod export;
pub mod list;
pub mod show;
pub mod sync;
pub mod validate;

pub use export::handle_export;
pub use list::handle_list;
pub use show::handle_show;
pub use sync::handle_sync;
pub use validate::handle_validate;
