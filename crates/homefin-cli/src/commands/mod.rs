pub mod growth;
pub mod loans;
pub mod revolving;
pub mod savings;
pub mod tax;
