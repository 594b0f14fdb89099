pub mod csv_series;
pub mod joined_csv;
