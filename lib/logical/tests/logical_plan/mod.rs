mod front_end;
mod substitution;
mod test_utils;
