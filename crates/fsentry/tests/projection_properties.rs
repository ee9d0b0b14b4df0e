//! Integration tests for projection stability across many projections.

use fsentry::{
    FieldMask, FsEntry, Projection, Statx, StatxMask, StatxTimestamp, Xattrs, parse_field, project,
};

fn entries() -> Vec<FsEntry> {
    vec![
        FsEntry::new(1_u64)
            .with_parent(0_u64, "a")
            .with_statx(
                Statx::new()
                    .with_mode(0o100_644)
                    .with_size(10)
                    .with_atime(StatxTimestamp::new(1, 2))
                    .with_mnt_id(3)
                    .with_dev(8, 1),
            )
            .with_inode_xattrs(Xattrs::new().with("user.a", "x").with("user.b", "y")),
        FsEntry::new(2_u64),
        FsEntry::new(3_u64).with_symlink("../elsewhere"),
        FsEntry::default().with_ns_xattrs(Xattrs::new().with("k", "v")),
    ]
}

fn projections() -> Vec<Projection> {
    let mut out = vec![
        Projection::default(),
        Projection::none(),
        Projection::of(FieldMask::ID | FieldMask::NAME),
        Projection::of(FieldMask::STATX).with_statx(StatxMask::ATIME_SEC | StatxMask::DEV_MINOR),
    ];

    let mut by_name = Projection::none();
    for name in ["id", "statx.type", "xattrs.user.b", "ns-xattrs"] {
        by_name.add(&parse_field(name).expect("valid field"));
    }
    out.push(by_name);

    let mut trimmed = Projection::default();
    trimmed.remove(&parse_field("xattrs.user.a").expect("valid field"));
    out.push(trimmed);

    out
}

#[test]
fn projecting_twice_equals_projecting_once() {
    for projection in projections() {
        for entry in entries() {
            let once = project(entry, &projection).expect("first projection");
            let twice = project(once.clone(), &projection).expect("second projection");
            assert_eq!(once, twice, "projection {projection:?}");
        }
    }
}

#[test]
fn projected_fields_are_a_subset_of_requested_and_present() {
    for projection in projections() {
        for entry in entries() {
            let present = entry.mask();
            let projected = project(entry, &projection).expect("projects");
            let kept = projected.mask();

            assert!(projection.fields.contains(kept));
            assert!(present.contains(kept));
            if let Some(statx) = projected.statx {
                assert!(projection.statx.contains(statx.mask()));
            }
        }
    }
}
