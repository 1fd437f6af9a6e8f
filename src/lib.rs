pub mod acquisition;
pub mod app;
pub mod record;
pub mod samples;
pub mod serial;
pub mod updater;
