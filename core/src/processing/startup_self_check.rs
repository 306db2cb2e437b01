use std::io::Cursor;

use image::{DynamicImage, Rgb, RgbImage};

use crate::{
    catalog::storage_key,
    core::storage::{Storage, StorageProvider},
    model::Size,
};

use super::image::{inspect, resize, ImageFormat, Resampling};

pub async fn run_self_check(storage: &Storage) -> Result<(), ()> {
    check_storage_round_trip(storage).await?;
    check_can_resize_images().await?;
    Ok(())
}

async fn check_storage_round_trip(storage: &Storage) -> Result<(), ()> {
    let key = format!(".self-check-{}", storage_key::unique_basename("bin"));
    let contents = b"picstash storage check".to_vec();
    if let Err(err) = storage.write_with_shadow(&key, contents.clone()).await {
        tracing::error!("Storage directory is not writable: {:#}", err);
        return Err(());
    }
    let read_back = storage.read(&key).await;
    let shadow_exists = storage.exists(&storage_key::shadow(&key)).await;
    storage.remove_with_shadow(&key).await;
    match read_back {
        Ok(read) if read == contents => {}
        Ok(_) => {
            tracing::error!("Storage check failed, file contents differ after reading back");
            return Err(());
        }
        Err(err) => {
            tracing::error!("Storage check failed, error reading file back: {}", err);
            return Err(());
        }
    }
    match shadow_exists {
        Ok(true) => {}
        Ok(false) => {
            tracing::error!("Storage check failed, compressed copy was not written");
            return Err(());
        }
        Err(err) => {
            tracing::error!("Storage check failed: {:#}", err);
            return Err(());
        }
    }
    if storage.exists(&key).await.unwrap_or(true) {
        tracing::error!("Storage check failed, could not remove test file {}", key);
        return Err(());
    }
    tracing::debug!("ok: storage round trip");
    Ok(())
}

async fn check_can_resize_images() -> Result<(), ()> {
    for format in [ImageFormat::Jpeg, ImageFormat::Png, ImageFormat::Gif] {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 48, Rgb([30, 60, 90])));
        let img = match format {
            ImageFormat::Gif => DynamicImage::ImageRgba8(img.to_rgba8()),
            _ => img,
        };
        let mut encoded = Cursor::new(Vec::new());
        if let Err(err) = img.write_to(&mut encoded, format.into()) {
            tracing::error!("Error encoding test {} image: {}", format, err);
            return Err(());
        }
        let bounds = Size {
            width: 32,
            height: 32,
        };
        let resized = match resize(encoded.into_inner(), format, bounds, Resampling::Lanczos).await {
            Ok(resized) => resized,
            Err(err) => {
                tracing::error!("Error resizing test {} image: {:#}", format, err);
                return Err(());
            }
        };
        match inspect(&resized.contents) {
            Ok(info) if info.format == format && info.size == resized.size => {
                tracing::debug!("ok: can resize {} image", format);
            }
            _ => {
                tracing::error!("Resized test {} image can not be read back", format);
                return Err(());
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use camino::Utf8PathBuf as PathBuf;
    use claims::{assert_err, assert_ok};

    use crate::core::storage::LocalFileStorage;

    use super::*;

    #[tokio::test]
    async fn self_check_passes_on_writable_dir() {
        let dir = tempfile::tempdir().unwrap();
        let root = PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        let storage: Storage = LocalFileStorage::new(root).into();
        assert_ok!(run_self_check(&storage).await);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn self_check_fails_on_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let root = PathBuf::from_path_buf(dir.path().join("missing")).unwrap();
        let storage: Storage = LocalFileStorage::new(root).into();
        assert_err!(run_self_check(&storage).await);
    }
}
