pub mod resident;
