pub mod card_text;
pub mod cartola_csv;
