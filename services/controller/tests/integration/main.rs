mod helpers;

mod fleet_test;
mod launch_test;
mod session_test;
