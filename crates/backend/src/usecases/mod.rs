pub mod u501_load_sales_dataset;
