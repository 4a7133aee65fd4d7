//! Test fixtures: zip archives and small encoded images.

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::{Cursor, Write};
use zip::write::{FileOptions, ZipWriter};
use zip::CompressionMethod;

fn gradient(width: u32, height: u32) -> DynamicImage {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 255 / width) as u8, (y * 255 / height) as u8, 160])
    });
    DynamicImage::ImageRgb8(img)
}

/// Small image encoded in `format`.
pub fn encoded_image(format: ImageFormat) -> Vec<u8> {
    let mut buffer = Vec::new();
    gradient(48, 32)
        .write_to(&mut Cursor::new(&mut buffer), format)
        .expect("Failed to encode fixture image");
    buffer
}

pub fn jpeg() -> Vec<u8> {
    encoded_image(ImageFormat::Jpeg)
}

pub fn png() -> Vec<u8> {
    encoded_image(ImageFormat::Png)
}

pub fn tiff() -> Vec<u8> {
    encoded_image(ImageFormat::Tiff)
}

/// Zip archive with deflated members in the given order.
pub fn zip_archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
    build_zip(entries, CompressionMethod::Deflated)
}

/// Zip archive with stored (uncompressed) members, so payload bytes can be located.
pub fn stored_zip_archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
    build_zip(entries, CompressionMethod::Stored)
}

fn build_zip(entries: &[(&str, &[u8])], method: CompressionMethod) -> Vec<u8> {
    let mut buffer = Vec::new();
    {
        let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
        let options = FileOptions::default().compression_method(method);
        for (name, data) in entries {
            if name.ends_with('/') {
                zip.add_directory(*name, options)
                    .expect("Failed to add directory");
            } else {
                zip.start_file(*name, options).expect("Failed to start entry");
                zip.write_all(data).expect("Failed to write entry");
            }
        }
        zip.finish().expect("Failed to finish archive");
    }
    buffer
}

/// Flip the first byte of `needle` inside `archive`.
pub fn corrupt(archive: &mut [u8], needle: &[u8]) {
    let idx = archive
        .windows(needle.len())
        .position(|w| w == needle)
        .expect("Payload not found in archive");
    archive[idx] ^= 0xFF;
}

pub fn is_jpeg(bytes: &[u8]) -> bool {
    bytes.starts_with(&[0xFF, 0xD8, 0xFF])
}

fn crc32(data: &[u8]) -> u32 {
    let mut crc = !0u32;
    for &byte in data {
        crc ^= byte as u32;
        for _ in 0..8 {
            let mask = (crc & 1).wrapping_neg();
            crc = (crc >> 1) ^ (0xEDB8_8320 & mask);
        }
    }
    !crc
}

/// Zip archive whose stored members set general purpose flag bit 3.
///
/// Local headers carry zero CRC and sizes; the real values follow each payload
/// in a data descriptor and are repeated in the central directory. Streaming
/// writers (Java's `ZipOutputStream`, `zip -` on a pipe) produce this layout.
pub fn data_descriptor_zip_archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut central = Vec::new();

    for (name, data) in entries {
        let offset = out.len() as u32;
        let crc = crc32(data);
        let size = data.len() as u32;
        let name_len = (name.len() as u16).to_le_bytes();

        // Local header: version 2.0, flags 0x0008, stored, 1980-01-01.
        out.extend_from_slice(&0x0403_4b50u32.to_le_bytes());
        out.extend_from_slice(&20u16.to_le_bytes());
        out.extend_from_slice(&0x0008u16.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&[0, 0, 0x21, 0]);
        out.extend_from_slice(&[0; 12]);
        out.extend_from_slice(&name_len);
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(name.as_bytes());
        out.extend_from_slice(data);
        out.extend_from_slice(&0x0807_4b50u32.to_le_bytes());
        for value in [crc, size, size] {
            out.extend_from_slice(&value.to_le_bytes());
        }

        central.extend_from_slice(&0x0201_4b50u32.to_le_bytes());
        central.extend_from_slice(&20u16.to_le_bytes());
        central.extend_from_slice(&20u16.to_le_bytes());
        central.extend_from_slice(&0x0008u16.to_le_bytes());
        central.extend_from_slice(&0u16.to_le_bytes());
        central.extend_from_slice(&[0, 0, 0x21, 0]);
        for value in [crc, size, size] {
            central.extend_from_slice(&value.to_le_bytes());
        }
        central.extend_from_slice(&name_len);
        // Extra and comment lengths, disk number, internal and external attributes.
        central.extend_from_slice(&[0; 12]);
        central.extend_from_slice(&offset.to_le_bytes());
        central.extend_from_slice(name.as_bytes());
    }

    let central_offset = out.len() as u32;
    let count = (entries.len() as u16).to_le_bytes();
    out.extend_from_slice(&central);
    out.extend_from_slice(&0x0605_4b50u32.to_le_bytes());
    out.extend_from_slice(&[0; 4]);
    out.extend_from_slice(&count);
    out.extend_from_slice(&count);
    out.extend_from_slice(&(central.len() as u32).to_le_bytes());
    out.extend_from_slice(&central_offset.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out
}
