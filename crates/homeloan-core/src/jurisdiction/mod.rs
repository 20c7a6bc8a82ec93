pub mod acquisition_costs;
