pub mod csv_scan;
pub mod numeric;
