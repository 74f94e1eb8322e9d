pub(crate) mod disposable;
pub(crate) mod error;
pub(crate) mod lock;

#[cfg(test)]
pub(crate) mod test_utils;
