pub mod containers;
pub mod execute;
pub mod info;
