// Application layer: caller-side policy on top of the verification client.

pub mod license_check;
