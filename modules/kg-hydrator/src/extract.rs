use spider_transformations::transformation::content::{
    transform_content_input, ReturnFormat, TransformConfig, TransformInput,
};

/// Reduce fully-rendered HTML down to its main-content text.
///
/// Readability strips chrome (nav, ads, footers) and `main_content` keeps
/// only the detected article body. The markdown rendering is what
/// `articles.raw_text` stores, not the raw DOM — the Digester's Extractor
/// client reads prose, not markup.
pub(crate) fn extract_main_text(html: &str, url: &str) -> String {
    let parsed_url = url::Url::parse(url).ok();
    let config = TransformConfig {
        readability: true,
        main_content: true,
        return_format: ReturnFormat::Markdown,
        filter_images: true,
        filter_svg: true,
        clean_html: true,
    };
    let input = TransformInput {
        url: parsed_url.as_ref(),
        content: html.as_bytes(),
        screenshot_bytes: None,
        encoding: None,
        selector_config: None,
        ignore_tags: None,
    };

    transform_content_input(input, &config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_chrome_and_keeps_body_text() {
        let html = r#"
            <html><body>
            <nav>Home | About | Contact</nav>
            <article><h1>Headline</h1><p>The actual story text goes here.</p></article>
            <footer>Copyright 2024</footer>
            </body></html>
        "#;
        let text = extract_main_text(html, "https://example.com/story");
        assert!(text.contains("actual story text"));
    }
}
