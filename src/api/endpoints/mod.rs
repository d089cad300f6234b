pub mod advice;
pub mod ocr_health;
pub mod ocr_invoice;
pub mod status;
pub mod summary;
