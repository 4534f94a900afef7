pub mod angle_table;
pub mod delay_line;
pub mod filters;
pub mod fixed_point;
