pub mod meter_kernel;
