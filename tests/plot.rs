use posegen::visualize::plot;

#[test]
fn empty_traces_do_not_plot() {
    let dir = tempfile::tempdir().unwrap();
    let folder = dir.path().to_str().unwrap();

    plot::draw_convergence_graph(&Vec::new(), folder, "loss.png").unwrap();
    plot::draw_score_histogram(&Vec::new(), 20, folder, "scores.png").unwrap();

    assert!(!dir.path().join("loss.png").exists());
    assert!(!dir.path().join("scores.png").exists());
}
