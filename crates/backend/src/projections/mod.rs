pub mod p900_enriched_sales;
