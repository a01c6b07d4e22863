pub mod content;
pub mod error;
pub mod page_data;
pub mod paths;
pub mod sections;
