//! Scenario tests spanning several physics modules
