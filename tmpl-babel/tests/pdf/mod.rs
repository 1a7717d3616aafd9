#[cfg(all(unix, feature = "native-export"))]
mod unix {
    use crate::common::{read_fixture, write_stub_chrome};
    use std::collections::HashMap;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::tempdir;
    use tmpl_babel::format::{Format, SerializedDocument};
    use tmpl_babel::formats::pdf::PdfFormat;
    use tmpl_babel::publish::{publish, PublishArtifact, PublishSpec};
    use tmpl_babel::RenderContext;

    // Tests in this module swap TMPL_CHROME_BIN, which is process-global.
    static CHROME_ENV: Mutex<()> = Mutex::new(());

    fn with_stub_chrome<T>(f: impl FnOnce(&std::path::Path) -> T) -> T {
        let _guard = CHROME_ENV.lock().unwrap_or_else(|e| e.into_inner());
        let (dir, chrome_stub) = write_stub_chrome();
        let prev = std::env::var("TMPL_CHROME_BIN").ok();
        std::env::set_var("TMPL_CHROME_BIN", &chrome_stub);

        let result = f(dir.path());

        if let Some(prev) = prev {
            std::env::set_var("TMPL_CHROME_BIN", prev);
        } else {
            std::env::remove_var("TMPL_CHROME_BIN");
        }
        result
    }

    #[test]
    fn pdf_renderer_uses_chrome_stub() {
        with_stub_chrome(|stub_dir| {
            let format = PdfFormat::default();
            let mut options = HashMap::new();
            options.insert("size".to_string(), "letter".to_string());

            let html = "<html><head><title>t</title></head><body>PDF test</body></html>";
            match format.serialize_with_options(html, &options).unwrap() {
                SerializedDocument::Binary(bytes) => assert!(bytes.starts_with(b"%PDF")),
                _ => panic!("Expected binary PDF output"),
            }

            let printed = fs::read_to_string(stub_dir.join("last-input.html")).unwrap();
            assert!(printed.contains("<head><style data-tmpl-pdf>\n@page { size: letter;"));
            assert!(printed.contains("PDF test"));
        });
    }

    #[test]
    fn pdf_renderer_injects_base_href() {
        with_stub_chrome(|stub_dir| {
            let assets = tempdir().unwrap();
            let mut options = HashMap::new();
            options.insert(
                "base-dir".to_string(),
                assets.path().display().to_string(),
            );

            PdfFormat::default()
                .serialize_with_options("<html><head></head><body></body></html>", &options)
                .unwrap();

            let printed = fs::read_to_string(stub_dir.join("last-input.html")).unwrap();
            assert!(printed.contains("<head><base href=\"file://"));
        });
    }

    #[test]
    fn publish_writes_pdf_and_html_copy() {
        with_stub_chrome(|_| {
            let out_dir = tempdir().unwrap();
            let output = out_dir.path().join("policy_report.pdf");
            let template = read_fixture("policy_report.html");
            let ctx = RenderContext::from_json_str(r#"{"policy_report": {"holder": "Ann"}}"#)
                .unwrap();

            let result = publish(
                PublishSpec::new(&template, &ctx, "pdf")
                    .with_output_path(&output)
                    .keep_html(true),
            )
            .unwrap();

            assert_eq!(result.artifact, PublishArtifact::File(output.clone()));
            assert!(fs::read(&output).unwrap().starts_with(b"%PDF"));

            let html_copy = result.html_copy.expect("html copy");
            assert_eq!(html_copy, out_dir.path().join("policy_report.html"));
            assert!(fs::read_to_string(html_copy)
                .unwrap()
                .contains("<p>Holder: Ann</p>"));
        });
    }

    #[test]
    fn html_copy_is_skipped_when_it_would_overwrite_the_output() {
        with_stub_chrome(|_| {
            let out_dir = tempdir().unwrap();
            let output = out_dir.path().join("report.html");
            let ctx = RenderContext::new();

            let result = publish(
                PublishSpec::new("<html><head></head><body>x</body></html>", &ctx, "pdf")
                    .with_output_path(&output)
                    .keep_html(true),
            )
            .unwrap();

            assert_eq!(result.artifact, PublishArtifact::File(output.clone()));
            assert_eq!(result.html_copy, None);
            assert!(fs::read(&output).unwrap().starts_with(b"%PDF"));
        });
    }

    #[test]
    fn publish_pdf_requires_output_path() {
        with_stub_chrome(|_| {
            let ctx = RenderContext::new();
            let err = publish(PublishSpec::new("<p>x</p>", &ctx, "pdf")).unwrap_err();
            assert!(err.to_string().contains("requires an explicit output path"));
        });
    }

    #[test]
    fn failing_browser_is_reported() {
        let _guard = CHROME_ENV.lock().unwrap_or_else(|e| e.into_inner());
        let prev = std::env::var("TMPL_CHROME_BIN").ok();
        std::env::set_var("TMPL_CHROME_BIN", "/bin/false");

        let err = PdfFormat::default()
            .serialize_with_options("<p>x</p>", &HashMap::new())
            .unwrap_err();
        assert!(err.to_string().contains("Chrome exited with status"));

        if let Some(prev) = prev {
            std::env::set_var("TMPL_CHROME_BIN", prev);
        } else {
            std::env::remove_var("TMPL_CHROME_BIN");
        }
    }
}

#[cfg(not(all(unix, feature = "native-export")))]
#[test]
fn pdf_stub_skipped() {
    eprintln!("Skipping PDF tests (native-export feature or Unix required)");
}
