//! Configuration access port trait.

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;
    fn get_double(&self, section: &str, key: &str, default: f64) -> f64;
    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool;

    /// Unsigned value that has no default: `None` when absent or unparseable.
    fn get_optional_u64(&self, section: &str, key: &str) -> Option<u64> {
        self.get_string(section, key)
            .and_then(|v| v.trim().parse().ok())
    }
}
