use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use crate::parse::{MediaKind, ObservationMetadata};

const FILE_DATE_FORMAT: &str = "%Y-%m-%d-%H-%M";

/// Local path for the `ordinal`-th asset of `kind` on an observation:
/// `<images_dir>/<YYYY-MM-DD-HH-MM>-<title slug>[-<ordinal>].<ext>`.
/// The first asset of each kind gets no ordinal suffix.
pub fn media_path(
    images_dir: &Path,
    metadata: &ObservationMetadata,
    ordinal: usize,
    kind: MediaKind,
) -> PathBuf {
    let mut file_name = format!(
        "{}-{}",
        metadata.date.format(FILE_DATE_FORMAT),
        slugify(&metadata.title)
    );
    if ordinal > 0 {
        file_name.push_str(&format!("-{ordinal}"));
    }
    file_name.push('.');
    file_name.push_str(kind.extension());

    images_dir.join(file_name)
}

/// Drops non-ASCII characters, trims, and turns spaces and path separators (`/` and the
/// platform's own) into hyphens. Other punctuation is kept as is.
pub fn slugify(title: &str) -> String {
    title
        .chars()
        .filter(char::is_ascii)
        .collect::<String>()
        .trim()
        .replace([' ', '/', MAIN_SEPARATOR], "-")
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn metadata(title: &str) -> ObservationMetadata {
        ObservationMetadata {
            title: title.to_string(),
            description: String::new(),
            artist: "Ms Smith".to_string(),
            date: NaiveDate::from_ymd_opt(2023, 5, 2)
                .unwrap()
                .and_hms_opt(14, 30, 0)
                .unwrap(),
        }
    }

    #[test]
    fn first_image_has_no_ordinal_suffix() {
        let path = media_path(Path::new("./images"), &metadata("Art Day!"), 0, MediaKind::Image);
        assert_eq!(path, PathBuf::from("./images/2023-05-02-14-30-Art-Day!.jpeg"));
    }

    #[test]
    fn later_assets_are_suffixed_with_their_ordinal() {
        let images = Path::new("./images");
        let md = metadata("Art Day!");

        assert_eq!(
            media_path(images, &md, 1, MediaKind::Image),
            PathBuf::from("./images/2023-05-02-14-30-Art-Day!-1.jpeg")
        );
        assert_eq!(
            media_path(images, &md, 0, MediaKind::Video),
            PathBuf::from("./images/2023-05-02-14-30-Art-Day!.mp4")
        );
        assert_eq!(
            media_path(images, &md, 2, MediaKind::Video),
            PathBuf::from("./images/2023-05-02-14-30-Art-Day!-2.mp4")
        );
    }

    #[test]
    fn non_ascii_titles_give_ascii_names_without_spaces() {
        for title in ["  Café crème 🎨 ", "Über die Brücke", "日本語 title", "ñ ñ ñ"] {
            let path = media_path(Path::new("out"), &metadata(title), 3, MediaKind::Image);
            let name = path.file_name().unwrap().to_str().unwrap();
            assert!(name.is_ascii(), "{name}");
            assert!(!name.contains(' '), "{name}");
        }
        assert_eq!(slugify("  Café crème 🎨 "), "Caf-crme");
    }

    #[test]
    fn path_separators_stay_inside_the_images_dir() {
        let path = media_path(Path::new("out"), &metadata("Mum/Dad visit"), 0, MediaKind::Image);
        assert_eq!(path.parent(), Some(Path::new("out")));
        assert_eq!(path, PathBuf::from("out/2023-05-02-14-30-Mum-Dad-visit.jpeg"));
    }

    #[cfg(unix)]
    #[test]
    fn backslash_is_ordinary_punctuation_on_unix() {
        assert_eq!(slugify(r"Before\After day"), r"Before\After-day");
    }
}
