pub mod carehome;
