use std::fs;

use tempfile::TempDir;

use specsearch::error::Result;
use specsearch::index::{IndexBuilder, IndexKind};
use specsearch::io::{load_vectors, read_index, read_results, write_index, write_results};
use specsearch::search::IndexSearcher;
use specsearch::vector::VectorCorpus;

fn cloud(n: usize, dimension: usize) -> VectorCorpus {
    let rows: Vec<Vec<f32>> = (0..n)
        .map(|i| {
            (0..dimension)
                .map(|j| (((i * 13 + j * 7) % 89) as f32) * 0.21 - 9.0)
                .collect()
        })
        .collect();
    VectorCorpus::from_rows(&rows, dimension).unwrap()
}

#[test]
fn index_round_trip_reproduces_identical_results() -> Result<()> {
    let dir = TempDir::new().unwrap();
    let corpus = cloud(120, 8);
    let queries = cloud(15, 8);

    for (name, builder) in [
        ("flat.idx", IndexBuilder::new(IndexKind::Flat)),
        (
            "ivf.idx",
            IndexBuilder::new(IndexKind::Partitioned)
                .clusters(8)
                .nprobe(3)
                .seed(21),
        ),
    ] {
        let path = dir.path().join(name);
        let index = builder.build(&corpus)?;
        write_index(&index, &path)?;
        let reloaded = read_index(&path)?;

        let before = IndexSearcher::new(&index).search(&queries, 6)?;
        let after = IndexSearcher::new(&reloaded).search(&queries, 6)?;
        // Identical (distance, id) pairs in identical order, bit for bit.
        assert_eq!(before, after, "round trip changed results for {name}");
    }
    Ok(())
}

#[test]
fn full_pipeline_from_text_file_to_results_file() -> Result<()> {
    let dir = TempDir::new().unwrap();

    // Corpus on disk as a whitespace-delimited table.
    let vectors_path = dir.path().join("spectra.txt");
    let mut table = String::new();
    for (_, row) in cloud(60, 4).iter() {
        let line: Vec<String> = row.iter().map(|v| format!("{v}")).collect();
        table.push_str(&line.join(" "));
        table.push('\n');
    }
    fs::write(&vectors_path, table).unwrap();

    // Build and persist.
    let corpus = load_vectors(&vectors_path)?;
    assert_eq!(corpus.len(), 60);
    let index = IndexBuilder::new(IndexKind::Partitioned)
        .clusters(6)
        .seed(3)
        .build(&corpus)?;
    let index_path = dir.path().join("spectra.idx");
    write_index(&index, &index_path)?;

    // Reload and search the corpus against itself.
    let reloaded = read_index(&index_path)?;
    let results = IndexSearcher::new(&reloaded).search(&corpus, 5)?;
    assert_eq!(results.num_queries(), 60);

    // Every query vector is its own nearest neighbor at distance zero:
    // nprobe=1 always scans the query's own cluster.
    for q in 0..results.num_queries() {
        assert_eq!(results.ids_row(q)[0], q as i64);
        assert!(results.distances_row(q)[0] <= 1e-6);
    }

    // Persist results and read them back.
    let out_path = dir.path().join("out.h5");
    write_results(&results, &out_path)?;
    let reread = read_results(&out_path)?;
    assert_eq!(results, reread);
    Ok(())
}

#[test]
fn same_seed_builds_identical_partitioned_indexes() -> Result<()> {
    let corpus = cloud(80, 4);
    let queries = cloud(10, 4);

    let a = IndexBuilder::new(IndexKind::Partitioned)
        .clusters(5)
        .seed(99)
        .build(&corpus)?;
    let b = IndexBuilder::new(IndexKind::Partitioned)
        .clusters(5)
        .seed(99)
        .build(&corpus)?;

    let results_a = IndexSearcher::new(&a).search(&queries, 4)?;
    let results_b = IndexSearcher::new(&b).search(&queries, 4)?;
    assert_eq!(results_a, results_b);
    Ok(())
}
