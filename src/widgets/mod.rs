pub mod chart;
pub mod chart_export_modal;
pub mod controls;
pub mod debug;
pub mod form;
pub mod import_modal;
pub mod radio_block;
pub mod record_table;
pub mod text_input;
