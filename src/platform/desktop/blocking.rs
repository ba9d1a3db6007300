/// Runs file and database work from a UI handler. Loads are short enough to
/// stay on the UI thread; a worker pool would slot in here.
pub fn run_blocking<F, T>(f: F) -> T
where
    F: FnOnce() -> T,
{
    f()
}
