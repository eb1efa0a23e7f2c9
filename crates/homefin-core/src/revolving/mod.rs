pub mod minimum_payment;
