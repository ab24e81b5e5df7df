//! Long running insert / search / remove runs, logged under the target temp directory.
//!
//! The 10M-point runs are ignored by default; run them with `cargo test --release -- --ignored`.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use fastrand::Rng;
use logfile::LogFile;
use stratum::{Point2, Point4, Rect2, Rect4, Tree};

fn log_file(name: &str) -> LogFile {
    let path: PathBuf = [env!("CARGO_TARGET_TMPDIR"), "logs", name, "tree.log"]
        .iter()
        .collect();
    LogFile::create(path).unwrap()
}

fn seeded(log: &mut LogFile) -> Rng {
    let seed = fastrand::u64(..);
    log.appendln(format_args!("seed is: {seed}")).unwrap();
    Rng::with_seed(seed)
}

fn verify<P: stratum::Point, B: stratum::Bounds<P> + Clone>(tree: &Tree<P, B>) {
    tree.__debug_verify_tree_state()
        .map_err(|x| println!("{}", x))
        .unwrap();
}

fn unit() -> Rect2 {
    Rect2::new([0.0, 0.0], [1.0, 1.0])
}

/* -------------------------------------------- Insert ------------------------------------------- */

fn insert_and_search(name: &str, count: u64) {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut log = log_file(name);
    let mut rng = seeded(&mut log);
    let mut tree = Tree::<Point2, Rect2>::new(unit(), 16).unwrap();

    let start = Instant::now();
    for id in 0..count {
        tree.insert(Point2::new(id, [rng.f64(), rng.f64()]));
    }

    log.appendln(format_args!(
        "insertion of {count} points took {:?}, tree has height of {}",
        start.elapsed(),
        tree.height()
    ))
    .unwrap();

    let searches = 1000;
    let mut area = 0.;
    let mut elapsed = Duration::ZERO;
    let mut result = Vec::new();

    for _ in 0..searches {
        let (x, y) = (rng.f64(), rng.f64());
        let region = Rect2::new([x, y], [x + 0.5, y + 0.5]);
        area += region.area();
        result.clear();

        let start = Instant::now();
        tree.query_into(&region, &mut result);
        elapsed += start.elapsed();

        assert!(result.iter().all(|p| region.contains(&p.pos)));
    }

    log.appendln(format_args!(
        "{searches} searches with avg size of {:.2}units^2 took on avg {:?}",
        area / searches as f64,
        elapsed / searches
    ))
    .unwrap();

    assert_eq!(tree.count() as u64, count);
    verify(&tree);
}

#[test]
fn insert() {
    insert_and_search("insert", 100_000);
}

#[test]
#[ignore]
fn insert_10m() {
    insert_and_search("insert-10m", 10_000_000);
}

/* -------------------------------------------- Remove ------------------------------------------- */

#[test]
fn remove_and_reinsert() {
    let mut log = log_file("remove");
    let mut rng = Rng::with_seed(659);
    let mut tree = Tree::<Point2, Rect2>::new(unit(), 4).unwrap();

    let points: Vec<_> = (0..20)
        .map(|id| Point2::new(id, [rng.f64(), rng.f64()]))
        .collect();

    for p in &points {
        assert!(tree.insert(*p));
    }

    log.appendln(format_args!("{tree}\n\n")).unwrap();

    let victims = [3, 0, 19, 11, 12, 16, 10, 7];
    for &id in &victims {
        assert!(tree.remove(&points[id]));
        verify(&tree);
    }

    assert_eq!(tree.count(), 12);
    assert!(tree
        .query(&unit())
        .iter()
        .all(|p| !victims.contains(&(p.id as usize))));

    log.appendln(format_args!("{tree}\n\n")).unwrap();

    for &id in &victims {
        assert!(tree.insert(points[id]));
    }

    log.appendln(format_args!("{tree}\n\n")).unwrap();

    assert_eq!(tree.count(), 20);
    verify(&tree);
}

/* --------------------------------------- Insert And Remove ------------------------------------- */

fn insert_and_remove(name: &str, count: u64) {
    let mut log = log_file(name);
    let mut rng = seeded(&mut log);
    let mut tree = Tree::<Point2, Rect2>::new(unit(), 16).unwrap();

    let chance = 0.01;
    let mut points: Vec<(bool, Point2)> = Vec::new();
    let (mut inserts, mut removals) = (0u32, 0u32);
    let (mut insert_time, mut remove_time) = (Duration::ZERO, Duration::ZERO);

    for id in 0..count {
        if rng.f64() < chance && !tree.is_empty() {
            let pick = rng.usize(..points.len());
            let (exists, p) = points[pick];
            if !exists {
                continue;
            }

            let start = Instant::now();
            assert!(tree.remove(&p));
            remove_time += start.elapsed();

            points[pick].0 = false;
            removals += 1;
        } else {
            let p = Point2::new(id, [rng.f64(), rng.f64()]);

            let start = Instant::now();
            assert!(tree.insert(p));
            insert_time += start.elapsed();

            points.push((true, p));
            inserts += 1;
        }
    }

    log.appendln(format_args!(
        "avg insert time: {:?} ; avg removal time: {:?}",
        insert_time / inserts.max(1),
        remove_time / removals.max(1)
    ))
    .unwrap();

    let live = points.iter().filter(|(exists, _)| *exists).count();
    assert_eq!(tree.count(), live);
    verify(&tree);
}

#[test]
fn insert_remove() {
    insert_and_remove("iar", 200_000);
}

#[test]
#[ignore]
fn insert_remove_10m() {
    insert_and_remove("iar-10m", 10_000_000);
}

/* ---------------------------------------------- 4D --------------------------------------------- */

#[test]
fn insert_4d() {
    let mut log = log_file("insert-4d");
    let mut rng = seeded(&mut log);
    let mut tree = Tree::<Point4, Rect4>::new(Rect4::new([0.0; 4], [1.0; 4]), 16).unwrap();

    let count = 50_000;
    let start = Instant::now();
    for id in 0..count {
        let pos = [rng.f64(), rng.f64(), rng.f64(), rng.f64()];
        tree.insert(Point4::new(id, pos));
    }

    log.appendln(format_args!(
        "insertion of {count} 4d points took {:?}, tree has height of {}",
        start.elapsed(),
        tree.height()
    ))
    .unwrap();

    let region = Rect4::new([0.25; 4], [0.75; 4]);
    let found = tree.query(&region);
    log.appendln(format_args!("{} points in {region}", found.len()))
        .unwrap();

    assert_eq!(tree.count() as u64, count);
    assert!(found.iter().all(|p| region.contains(&p.pos)));
    verify(&tree);
}
