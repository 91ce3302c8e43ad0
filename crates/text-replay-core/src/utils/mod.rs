pub mod io_utils;
pub mod row;
