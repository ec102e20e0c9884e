extern crate plotters;

use plotters::prelude::*;

use crate::{float, Float};

fn get_min_max(data_vectors: Vec<&Vec<Float>>) -> (Float, Float) {

    let mut min = float::MAX;
    let mut max = float::MIN;

    for j in 0..data_vectors.len() {
        let data = data_vectors[j];
        for i in 0..data.len() {
            let v = data[i];

            if v < min {
                min = v;
            }

            if v > max {
                max = v;
            }
        }

    }

    if (max-min) < 1e-5 {
        max = min + 1e-5;
    }

    (min, max)
}

/**
 * Per-iteration controller error, degrees over iteration number.
 */
pub fn draw_convergence_graph(errors: &Vec<Float>, output_folder: &str, file_name: &str) -> Result<(), Box<dyn std::error::Error>> {
    if errors.is_empty() {
        return Ok(());
    }
    let degrees = errors.iter().map(|e| e*180.0/std::f64::consts::PI).collect::<Vec<Float>>();
    let (min, max) = get_min_max(vec!(&degrees));

    let path = format!("{}/{}", output_folder, file_name);
    let root = BitMapBackend::new(&path, (1024, 768)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .set_label_area_size(LabelAreaPosition::Left, 60)
        .set_label_area_size(LabelAreaPosition::Bottom, 60)
        .caption("Angle Difference To Goal Orientation", ("sans-serif", 40))
        .build_cartesian_2d(0..(degrees.len() - 1), min..max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .draw()?;

    chart.draw_series(
        LineSeries::new(
            (0..).zip(degrees.iter()).map(|(x, y)| (x, *y)),
            &RED.mix(0.2),
        )
    )?;

    Ok(())
}

/**
 * Distribution of pair dissimilarity scores as a simple binned line graph.
 */
pub fn draw_score_histogram(scores: &Vec<Float>, bins: usize, output_folder: &str, file_name: &str) -> Result<(), Box<dyn std::error::Error>> {
    if scores.is_empty() || bins == 0 {
        return Ok(());
    }
    let (min, max) = get_min_max(vec!(scores));
    let bin_width = (max - min)/(bins as Float);

    let mut counts = vec![0.0; bins];
    for score in scores {
        let mut idx = ((score - min)/bin_width) as usize;
        if idx >= bins {
            idx = bins - 1;
        }
        counts[idx] += 1.0;
    }

    let (count_min, count_max) = get_min_max(vec!(&counts));

    let path = format!("{}/{}", output_folder, file_name);
    let root = BitMapBackend::new(&path, (1024, 768)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .set_label_area_size(LabelAreaPosition::Left, 60)
        .set_label_area_size(LabelAreaPosition::Bottom, 60)
        .caption("Dissimilarity Scores", ("sans-serif", 40))
        .build_cartesian_2d(0..(counts.len() - 1), count_min..count_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .draw()?;

    chart.draw_series(
        LineSeries::new(
            (0..).zip(counts.iter()).map(|(x, y)| (x, *y)),
            &RED.mix(0.2),
        )
    )?;

    Ok(())
}
