pub mod boxcar;
