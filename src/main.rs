use std::time::SystemTime;

use treeml::{
    dataset::{load_csv, CsvOptions, Dataset},
    ensemble::{BaggingParamsBuilder, BoostingParamsBuilder},
    metrics::evaluate,
    synthetic::friedman1,
    tree::TreeParamsBuilder,
    Bagging, Boosting, Estimator, RegressionTree, Result,
};

fn split_halves(data: &Dataset) -> (Dataset, Dataset) {
    let n = data.n_rows();
    let train: Vec<usize> = (0..n / 2).collect();
    let test: Vec<usize> = (n / 2..n).collect();
    (data.select(&train), data.select(&test))
}

fn report(name: &str, model: &mut dyn Estimator, test: &Dataset) -> Result<()> {
    let start = SystemTime::now();
    model.fit()?;
    let elapsed = start.elapsed().unwrap_or_default();

    let preds = model.predict_batch(test.x())?;
    let test_metrics = evaluate(test.y(), preds.view());
    println!("== {} (fitted in {:?})", name, elapsed);
    println!("Training:\n{}", model.metrics());
    println!("Test:\n{}", test_metrics);
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let data = match std::env::args().nth(1) {
        Some(path) => {
            let labeled = load_csv(&path, &CsvOptions::default())?;
            log::info!(
                "loaded {} rows from {}, target column {}",
                labeled.dataset.n_rows(),
                path,
                labeled.target_name
            );
            labeled.dataset
        }
        None => friedman1(1000, 10, 1.0, 42)?,
    };
    if data.n_rows() < 2 {
        return Err(treeml::Error::EmptyDataset);
    }
    let (train, test) = split_halves(&data);
    println!("Fitting on {} rows, testing on {}", train.n_rows(), test.n_rows());

    let tree_params = TreeParamsBuilder::new().max_depth(6).seed(42).build();

    let mut tree = RegressionTree::new(train.clone(), tree_params.clone())?;
    report("tree", &mut tree, &test)?;

    let mut bagging = Bagging::new(
        RegressionTree::factory(tree_params.clone()),
        train.clone(),
        &BaggingParamsBuilder::new().n_estimators(20).seed(42).build(),
    )?;
    report("bagging", &mut bagging, &test)?;
    if let Some(oob) = bagging.oob_metrics() {
        println!("Out-of-bag:\n{}", oob);
    }

    let mut boosting = Boosting::new(
        RegressionTree::factory(TreeParamsBuilder::new().max_depth(3).seed(42).build()),
        train,
        &BoostingParamsBuilder::new().n_estimators(50).build(),
    )?;
    report("boosting", &mut boosting, &test)?;
    println!("Boosting state: {:?}", boosting.state());

    Ok(())
}
