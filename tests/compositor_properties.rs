use framefold::{
    BlockGeometry, BlockHasher, CompositorOpts, Extent, FrameCompositor, Gradient, RenderBuffer,
    Scale, fill_gradient,
};

fn compositor(w: u32, h: u32, scale: u32) -> FrameCompositor {
    FrameCompositor::new(
        Extent::new(w, h).unwrap(),
        Scale::new(scale).unwrap(),
        &CompositorOpts::default(),
    )
    .unwrap()
}

fn render_buffer(w: u32, h: u32, scale: u32) -> RenderBuffer {
    let hi = Extent::new(w, h)
        .unwrap()
        .scaled(Scale::new(scale).unwrap())
        .unwrap();
    RenderBuffer::new(hi)
}

#[test]
fn hashing_a_static_buffer_twice_gives_the_same_fingerprints() {
    let buf = render_buffer(6, 4, 3);
    fill_gradient(&buf, Gradient::Warm);
    let hasher = BlockHasher::new(BlockGeometry::new(
        Extent::new(6, 4).unwrap(),
        Scale::new(3).unwrap(),
    ));

    let first: Vec<u64> = (0..4)
        .flat_map(|y| (0..6).map(move |x| (x, y)))
        .map(|(x, y)| hasher.hash(&buf, x, y))
        .collect();
    let second: Vec<u64> = (0..4)
        .flat_map(|y| (0..6).map(move |x| (x, y)))
        .map(|(x, y)| hasher.hash(&buf, x, y))
        .collect();
    assert_eq!(first, second);
}

#[test]
fn primaries_fold_to_floor_mean() {
    let buf = render_buffer(1, 1, 2);
    buf.store_pixel(0, 0, [0, 0, 0, 255]);
    buf.store_pixel(1, 0, [255, 0, 0, 255]);
    buf.store_pixel(0, 1, [0, 255, 0, 255]);
    buf.store_pixel(1, 1, [0, 0, 255, 255]);

    let mut c = compositor(1, 1, 2);
    c.compose_buffer(&buf);
    assert_eq!(c.display().pixel(0, 0), [63, 63, 63, 255]);
}

#[test]
fn scale_one_display_is_a_copy_of_the_render_buffer() {
    let mut c = compositor(9, 7, 1);
    let buf = render_buffer(9, 7, 1);
    for (seed, g) in [Gradient::Warm, Gradient::Cool].into_iter().enumerate() {
        fill_gradient(&buf, g);
        buf.store_pixel(seed as u32, 3, [1, 2, 3, 4]);
        c.compose_buffer(&buf);
        assert_eq!(c.display().as_bytes(), buf.to_vec().as_slice());
    }
}

#[test]
fn fresh_compositor_writes_every_pixel_once() {
    let (w, h) = (8, 5);
    let buf = render_buffer(w, h, 2);
    buf.fill([17, 34, 51, 255]);

    let mut c = compositor(w, h, 2);
    let stats = c.compose_buffer(&buf);
    assert_eq!(stats.blocks_total, u64::from(w * h));
    assert_eq!(stats.blocks_recomputed, u64::from(w * h));
    assert_eq!(stats.blocks_skipped, 0);
    assert!(
        c.display()
            .as_bytes()
            .chunks_exact(4)
            .all(|px| px == [17, 34, 51, 255])
    );
}

#[test]
fn untouched_blocks_stay_bit_identical() {
    let buf = render_buffer(4, 4, 2);
    fill_gradient(&buf, Gradient::Cool);
    let mut c = compositor(4, 4, 2);
    c.compose_buffer(&buf);
    let before = c.display().clone();

    // Change source pixel (5, 6), which belongs to display block (2, 3).
    buf.store_pixel(5, 6, [255, 255, 255, 255]);
    let stats = c.compose_buffer(&buf);
    assert_eq!(stats.blocks_recomputed, 1);

    for y in 0..4 {
        for x in 0..4 {
            if (x, y) == (2, 3) {
                assert_ne!(c.display().pixel(x, y), before.pixel(x, y));
            } else {
                assert_eq!(c.display().pixel(x, y), before.pixel(x, y));
            }
        }
    }
}

#[test]
fn parallel_pass_over_gradient_matches_sequential() {
    let buf = render_buffer(33, 17, 4);
    fill_gradient(&buf, Gradient::Warm);

    let mut seq = compositor(33, 17, 4);
    let mut par = FrameCompositor::new(
        Extent::new(33, 17).unwrap(),
        Scale::new(4).unwrap(),
        &CompositorOpts {
            parallel: true,
            threads: None,
        },
    )
    .unwrap();

    assert_eq!(seq.compose_buffer(&buf), par.compose_buffer(&buf));
    assert_eq!(seq.display(), par.display());
}
