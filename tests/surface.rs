use fbdev_surface::backends::memory::{MemorySetup, WriteRecord};
use fbdev_surface::{Error, PixelSurface, Point, Raster, Rgba};
use nix::errno::Errno;

#[test]
fn two_by_two_scenario() {
    let setup = MemorySetup::new(2, 2);
    let device = setup.device();
    let mut fb = PixelSurface::open_with(&setup, "/dev/fb0").unwrap();
    assert_eq!(fb.as_bytes(), &[0u8; 16]);

    fb.set_pixel(1, 0, &Rgba::rgb(10, 20, 30)).unwrap();
    let mut expected = [0u8; 16];
    expected[4..8].copy_from_slice(&[30, 20, 10, 0]);
    assert_eq!(fb.as_bytes(), &expected);
    assert_eq!(fb.get_pixel(1, 0).unwrap(), Rgba::new(10, 20, 30, 0));

    assert!(device.writes().is_empty());
    fb.flush().unwrap();
    assert_eq!(
        device.writes(),
        vec![WriteRecord {
            offset: 0,
            bytes: expected.to_vec()
        }]
    );
    assert_eq!(device.contents(), expected.to_vec());
    fb.close().unwrap();
    assert_eq!(device.open_handles(), 0);
}

#[test]
fn set_then_get_round_trips_every_pixel() {
    let setup = MemorySetup::new(7, 5);
    let mut fb = PixelSurface::open_with(&setup, "fb").unwrap();
    for y in 0..5 {
        for x in 0..7 {
            let c = Rgba::rgb((x * 37) as u8, (y * 51) as u8, (x * y + 200) as u8);
            fb.set_pixel(x, y, &c).unwrap();
            assert_eq!(fb.get_pixel(x, y).unwrap(), c);
        }
    }
}

#[test]
fn set_pixel_ignores_alpha() {
    let setup = MemorySetup::new(1, 1);
    let mut fb = PixelSurface::open_with(&setup, "fb").unwrap();
    fb.set_pixel(0, 0, &Rgba::new(1, 2, 3, 255)).unwrap();
    assert_eq!(fb.as_bytes(), &[3, 2, 1, 0]);
    assert_eq!(fb.get_pixel(0, 0).unwrap().a, 0);
}

#[test]
fn writing_one_pixel_leaves_the_others_alone() {
    let setup = MemorySetup::new(3, 3);
    let mut fb = PixelSurface::open_with(&setup, "fb").unwrap();
    for y in 0..3 {
        for x in 0..3 {
            fb.write_pixel(x, y, 0x11, 0x22, 0x33).unwrap();
        }
    }
    let before = fb.as_bytes().to_vec();

    fb.write_pixel(1, 2, 0xff, 0xee, 0xdd).unwrap();
    let offset = fb.pixel_offset(1, 2).unwrap();
    assert_eq!(offset, (2 * 3 + 1) * 4);
    for (i, (&a, &b)) in before.iter().zip(fb.as_bytes()).enumerate() {
        if !(offset..offset + 3).contains(&i) {
            assert_eq!(a, b, "byte {i} changed");
        }
    }
}

#[test]
fn bounds_never_change() {
    let setup = MemorySetup::new(4, 3);
    let mut fb = PixelSurface::open_with(&setup, "fb").unwrap();
    let bounds = fb.bounds();
    assert_eq!((bounds.min, bounds.max), (Point::new(0, 0), Point::new(4, 3)));

    fb.write_pixel(3, 2, 1, 1, 1).unwrap();
    fb.flush().unwrap();
    assert_eq!(fb.bounds(), bounds);
}

#[test]
fn open_does_not_read_back_device() {
    let setup = MemorySetup::new(2, 2);
    let device = setup.device();
    let first = PixelSurface::open_with(&setup, "fb").unwrap();
    device.fill(0xff);

    let second = PixelSurface::open_with(&setup, "fb").unwrap();
    assert!(second.as_bytes().iter().all(|&b| b == 0));
    drop(first);
}

#[test]
fn repeated_flushes_write_identical_bytes() {
    let setup = MemorySetup::new(2, 3);
    let device = setup.device();
    let mut fb = PixelSurface::open_with(&setup, "fb").unwrap();
    fb.write_pixel(0, 2, 9, 8, 7).unwrap();
    fb.flush().unwrap();
    fb.flush().unwrap();

    let writes = device.writes();
    assert_eq!(writes.len(), 2);
    assert_eq!(writes[0], writes[1]);
    assert_eq!(writes[0].offset, 0);
    assert_eq!(writes[0].bytes, fb.as_bytes());
}

#[test]
fn flush_error_keeps_buffer_and_can_be_retried() {
    let setup = MemorySetup::new(2, 2);
    let device = setup.device();
    let mut fb = PixelSurface::open_with(&setup, "fb").unwrap();
    fb.write_pixel(1, 1, 5, 6, 7).unwrap();
    let pending = fb.as_bytes().to_vec();

    device.set_fail_writes(true);
    assert!(matches!(fb.flush(), Err(Error::Io(_))));
    assert_eq!(fb.as_bytes(), pending);
    assert!(device.writes().is_empty());

    device.set_fail_writes(false);
    fb.flush().unwrap();
    assert_eq!(device.contents(), pending);
}

#[test]
fn failed_setup_is_an_init_error_with_nothing_open() {
    let setup = MemorySetup::new(2, 2).failing(Errno::ENOENT);
    let err = PixelSurface::open_with(&setup, "/dev/fb9").unwrap_err();
    match err {
        Error::Init { ref path, errno } => {
            assert_eq!(path.to_str(), Some("/dev/fb9"));
            assert_eq!(errno, Errno::ENOENT);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(setup.device().open_handles(), 0);
    assert!(setup.device().contents().is_empty());
}

#[test]
fn dropping_a_surface_releases_its_handle() {
    let setup = MemorySetup::new(1, 1);
    let fb = PixelSurface::open_with(&setup, "fb").unwrap();
    assert_eq!(setup.device().open_handles(), 1);
    drop(fb);
    assert_eq!(setup.device().open_handles(), 0);
}

#[test]
fn close_error_is_reported_and_handle_released() {
    let setup = MemorySetup::new(2, 2);
    let device = setup.device();
    let mut fb = PixelSurface::open_with(&setup, "fb").unwrap();
    fb.write_pixel(0, 0, 1, 2, 3).unwrap();
    fb.flush().unwrap();

    device.set_fail_close(true);
    assert!(matches!(fb.close(), Err(Error::Io(_))));
    assert_eq!(device.open_handles(), 0);
    assert_eq!(device.writes().len(), 1);
}
