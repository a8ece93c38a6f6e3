#![allow(unused_macros)]

/// Helper macro for reading locked items
///
/// ```rust, ignore
///  let table = read_lock!(self.table);
///  let entry = table.entries.get(index);
/// ```
macro_rules! read_lock {
    ($rwlock:expr) => {
        $rwlock.read().expect("Failed to acquire read lock")
    };
}

/// Helper macro for writing to locked items
///
/// ```rust, ignore
///  let mut table = write_lock!(self.table);
///  table.entries.push(Some(entry));
/// ```
macro_rules! write_lock {
    ($rwlock:expr) => {
        $rwlock.write().expect("Failed to acquire write lock")
    };
}
