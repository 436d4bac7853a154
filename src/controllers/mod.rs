pub mod live_controller;
pub mod monthly_controller;
pub mod simulation_controller;
