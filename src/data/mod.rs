pub mod key_value;

#[cfg(test)]
mod test;
