//! End-to-end voxelization tests.

mod common;

use approx::assert_relative_eq;
use common::*;
use drishti::core::TrigMode;
use drishti::projection::{CameraModel, ConeGeometry};
use drishti::{
    DrishtiConfig, DumpError, EnvelopeError, FrameError, LutMeta, StereoFrame, VoxelCoord,
    VoxelKey, load_dump, save_dump, voxelize,
};

fn run(dump: &drishti::Dump, options: &drishti::VoxelizeOptions) -> drishti::VoxelizeOutput {
    let p = &dump.params;
    voxelize(&dump.frame, &p.projection, &p.grid, &p.envelope, options).unwrap()
}

#[test]
fn test_reference_point_lands_in_expected_voxel() {
    let dump = reference_dump();
    let out = run(
        &dump,
        &options(CameraModel::Cylindrical, TrigMode::Exact, false),
    );

    assert_eq!(out.buffer.len(), 1);
    assert_eq!(out.buffer.keys()[0], VoxelKey::pack(5, 10, 10).raw());
    let p = out.buffer.points()[0];
    assert_eq!((p.x_mm, p.y_mm, p.z_mm), (0, 0, 0));
    assert_eq!(p.existence, 200);
    assert_eq!(out.buffer.counts()[0], 1);

    assert_eq!(out.report.cells, 1);
    assert_eq!(out.report.pixels.inserted, 1);
    assert_eq!(out.report.batches_merged, 1);
}

#[test]
fn test_reference_point_uncertainty() {
    let mut dump = reference_dump();
    dump.params.projection.baseline_error_mm = 0.5;
    let out = run(
        &dump,
        &options(CameraModel::Cylindrical, TrigMode::Exact, false),
    );
    // (100 * (4 + 0.05) + 0.02 * 1500) / 10 = 43.5 cm
    assert_eq!(out.buffer.points()[0].uncertainty_cm, 43);
}

#[test]
fn test_large_uncertainty_clamps_to_255() {
    let mut dump = reference_dump();
    dump.params.projection.baseline_error_mm = 1.0e4;
    let out = run(
        &dump,
        &options(CameraModel::Cylindrical, TrigMode::Exact, false),
    );
    assert_eq!(out.buffer.keys()[0], VoxelKey::pack(5, 10, 10).raw());
    assert_eq!(out.buffer.points()[0].uncertainty_cm, 255);
}

#[test]
fn test_oversized_envelope_rejected_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let mut dump = scene_dump(1);
    dump.params.envelope.x_min_mm = -3.0e9;
    dump.params.envelope.x_max_mm = 3.0e9;
    save_dump(dir.path(), &dump).unwrap();

    let err = load_dump(dir.path()).unwrap_err();
    assert!(matches!(
        err,
        DumpError::InvalidEnvelope(EnvelopeError::ExtentOutOfRange { axis: 'x', .. })
    ));
}

#[test]
fn test_reference_point_vehicle_position() {
    let dump = reference_dump();
    let out = run(
        &dump,
        &options(CameraModel::Cylindrical, TrigMode::Exact, false),
    );
    let voxel = out.buffer.finalized().next().unwrap();
    assert_eq!(voxel.coord, VoxelCoord::new(5, 10, 10));
    let pos = voxel.vehicle_position_mm(&dump.params.envelope);
    assert_relative_eq!(pos.x, 500.0);
    assert_relative_eq!(pos.y, 0.0);
    assert_relative_eq!(pos.z, 1000.0);
}

#[test]
fn test_row_of_pixels_merges_per_voxel() {
    // n_px runs 100..116, so z = 1000..1150 in 10 mm steps
    let mut dump = reference_dump();
    dump.params.projection = reference_projection(16);
    dump.params.grid = single_cell_grid(16, 1);
    dump.frame = uniform_frame(16, 1, 10, 50);

    let out = run(
        &dump,
        &options(CameraModel::Cylindrical, TrigMode::Exact, false),
    );

    assert_eq!(out.buffer.len(), 2);
    assert_eq!(out.report.pixels.inserted, 2);
    assert_eq!(out.report.pixels.merged, 14);

    let voxels: Vec<_> = out.buffer.finalized().collect();
    assert_eq!(voxels[0].coord, VoxelCoord::new(5, 10, 10));
    assert_eq!(voxels[0].samples, 10);
    assert_eq!(out.buffer.points()[0].z_mm, 450);
    assert_relative_eq!(voxels[0].mean_offset_mm.z, 45.0);

    assert_eq!(voxels[1].coord, VoxelCoord::new(5, 10, 11));
    assert_eq!(voxels[1].samples, 6);
    assert_eq!(out.buffer.points()[1].z_mm, 150);
    assert_relative_eq!(
        voxels[1].vehicle_position_mm(&dump.params.envelope).z,
        1125.0
    );
}

#[test]
fn test_conical_model_reference_point() {
    // Without cone terms: z = (n - d) * b / d, radius zero
    let mut dump = reference_dump();
    dump.params.projection.cone = ConeGeometry::new(0.0, 0.0);
    let out = run(
        &dump,
        &options(CameraModel::Conical, TrigMode::Polynomial, false),
    );

    assert_eq!(out.buffer.len(), 1);
    assert_eq!(VoxelKey(out.buffer.keys()[0]).coord(), VoxelCoord::new(10, 10, 9));
    let p = out.buffer.points()[0];
    assert_eq!((p.x_mm, p.y_mm, p.z_mm), (0, 0, 0));
}

#[test]
fn test_accepted_points_stay_inside_envelope() {
    for seed in [1, 7, 42] {
        let dump = scene_dump(seed);
        for model in [CameraModel::Cylindrical, CameraModel::Conical] {
            let out = run(&dump, &options(model, TrigMode::Polynomial, false));
            for voxel in out.buffer.finalized() {
                assert!(
                    dump.params.envelope.is_valid_coord(voxel.coord),
                    "seed {} {}: {:?} outside envelope",
                    seed,
                    model,
                    voxel.coord
                );
            }
        }
    }
}

#[test]
fn test_report_accounts_for_every_pixel() {
    let dump = scene_dump(3);
    let out = run(
        &dump,
        &options(CameraModel::Cylindrical, TrigMode::Polynomial, false),
    );
    let px = &out.report.pixels;

    assert_eq!(out.report.cells, 8);
    assert_eq!(px.pixels, SCENE_WIDTH * SCENE_HEIGHT);
    assert_eq!(
        px.rejected + px.out_of_grid + px.inserted + px.merged + px.collisions,
        px.pixels
    );
    assert!(px.rejected > 0);
    assert_eq!(out.report.voxels_merged, out.buffer.len());
    assert_eq!(out.report.batches_merged + out.report.batches_dropped, 8);
}

#[test]
fn test_small_buffer_drops_whole_batches() {
    let dump = scene_dump(5);
    let full = run(
        &dump,
        &options(CameraModel::Cylindrical, TrigMode::Polynomial, false),
    );
    assert!(full.buffer.len() > 30);

    let small = run(
        &dump,
        &drishti::VoxelizeOptions {
            buffer_capacity: 30,
            ..options(CameraModel::Cylindrical, TrigMode::Polynomial, false)
        },
    );

    assert!(small.buffer.len() < 30);
    assert!(small.report.batches_dropped > 0);
    assert_eq!(small.report.voxels_merged, small.buffer.len());
    assert_eq!(
        small.report.voxels_merged + small.report.voxels_dropped,
        full.buffer.len()
    );
    // Surviving batches are whole cells of the unconstrained run
    for key in small.buffer.keys() {
        assert!(full.buffer.keys().contains(key));
    }
}

#[test]
fn test_disparity_offset_skips_leading_samples() {
    let dump = scene_dump(11);
    let expected = run(
        &dump,
        &options(CameraModel::Cylindrical, TrigMode::Polynomial, false),
    );

    let mut shifted = dump.clone();
    let lead = 37;
    let mut disparity = vec![20u16; lead];
    disparity.extend_from_slice(&dump.frame.disparity);
    let mut confidence = vec![255u8; lead];
    confidence.extend_from_slice(&dump.frame.confidence);
    shifted.frame = StereoFrame::new(
        SCENE_WIDTH,
        SCENE_HEIGHT,
        disparity,
        confidence,
        dump.frame.lut.clone(),
    )
    .with_disp_offset(lead);

    let out = run(
        &shifted,
        &options(CameraModel::Cylindrical, TrigMode::Polynomial, false),
    );
    assert_eq!(out.buffer, expected.buffer);
}

#[test]
fn test_unstructured_lut_rejects_everything() {
    let mut dump = scene_dump(2);
    for meta in dump.frame.lut.iter_mut() {
        *meta = LutMeta::new(0, LutMeta::UNIT_SCALING);
    }
    let out = run(
        &dump,
        &options(CameraModel::Conical, TrigMode::Polynomial, false),
    );
    assert!(out.buffer.is_empty());
    assert_eq!(out.report.pixels.rejected, SCENE_WIDTH * SCENE_HEIGHT);
    // Empty batches still count as merged
    assert_eq!(out.report.batches_merged, 8);
}

#[test]
fn test_short_frame_is_rejected_before_processing() {
    let mut dump = scene_dump(4);
    dump.frame.disparity.truncate(100);
    let p = &dump.params;
    let err = voxelize(
        &dump.frame,
        &p.projection,
        &p.grid,
        &p.envelope,
        &options(CameraModel::Cylindrical, TrigMode::Polynomial, false),
    )
    .unwrap_err();
    assert!(matches!(err, FrameError::PixelOutOfRange { .. }));
}

#[test]
fn test_offset_past_end_is_rejected() {
    let mut dump = reference_dump();
    dump.frame.disp_offset = 2;
    let p = &dump.params;
    let err = voxelize(
        &dump.frame,
        &p.projection,
        &p.grid,
        &p.envelope,
        &options(CameraModel::Cylindrical, TrigMode::Exact, false),
    )
    .unwrap_err();
    assert!(matches!(err, FrameError::OffsetOutOfRange { offset: 2, len: 1 }));
}

#[cfg(feature = "parallel")]
#[test]
fn test_parallel_matches_sequential() {
    for seed in [1, 9] {
        let dump = scene_dump(seed);
        for model in [CameraModel::Cylindrical, CameraModel::Conical] {
            for capacity in [20_000, 40] {
                let sequential = run(
                    &dump,
                    &drishti::VoxelizeOptions {
                        buffer_capacity: capacity,
                        ..options(model, TrigMode::Polynomial, false)
                    },
                );
                let parallel = run(
                    &dump,
                    &drishti::VoxelizeOptions {
                        buffer_capacity: capacity,
                        ..options(model, TrigMode::Polynomial, true)
                    },
                );
                assert_eq!(parallel.buffer, sequential.buffer);
                assert_eq!(parallel.report, sequential.report);
            }
        }
    }
}

#[test]
fn test_dump_directory_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let dump = scene_dump(21);
    save_dump(dir.path(), &dump).unwrap();

    let loaded = load_dump(dir.path()).unwrap();
    assert_eq!(loaded.params, dump.params);

    let opts = options(CameraModel::Conical, TrigMode::Polynomial, false);
    assert_eq!(run(&loaded, &opts).buffer, run(&dump, &opts).buffer);
}

#[test]
fn test_config_drives_invocation() {
    let config = DrishtiConfig::from_yaml(
        r#"
pipeline:
  camera_model: cylindrical
  trig: exact
  parallel: false
buffer:
  capacity: 8
"#,
    )
    .unwrap();
    let out = run(&reference_dump(), &config.to_voxelize_options());
    assert_eq!(out.buffer.capacity(), 8);
    assert_eq!(out.buffer.keys(), &[VoxelKey::pack(5, 10, 10).raw()]);
}
