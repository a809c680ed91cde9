mod key_value;
