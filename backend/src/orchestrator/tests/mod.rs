mod test_invariant_checks;
