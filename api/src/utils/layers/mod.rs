mod error_details;

pub use self::error_details::*;
