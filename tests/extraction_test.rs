use chrono::NaiveDate;
use newsgrab::{Error, IndexParser, NewsParser, PageParser};

const INDEX_PAGE: &str = r#"
<!DOCTYPE html>
<html>
  <body>
    <ul>
      <li class="list-details"><a href="https://web.fosu.edu.cn/focus-news/30473.html">News one</a></li>
      <li class="list-details"><a href="/focus-news/30500.html">News two</a></li>
    </ul>
    <div class="pagination">
      <a class="extend" href="/school-news/page/1">1</a>
      <span class="current">2</span>
      <a class="extend" href="https://web.fosu.edu.cn/school-news/page/57">57</a>
    </div>
  </body>
</html>
"#;

const NEWS_PAGE: &str = r#"
<html>
  <body>
    <div class="content-title">
      <h1>Campus opens new library</h1>
      <p class="vartime">发布时间:2021-03-12</p>
    </div>
    <div class="content-item"><p>First paragraph.</p><p>Second paragraph.</p></div>
    <div class="content-item">Closing remarks.（记者 张三）</div>
  </body>
</html>
"#;

#[test]
fn index_parser_reads_links_page_and_last() {
    let meta = IndexParser::new(false)
        .parse(INDEX_PAGE)
        .expect("index page should parse");
    assert_eq!(meta.page, 2);
    assert_eq!(meta.last, 57);
    assert_eq!(
        meta.newses,
        vec![
            "https://web.fosu.edu.cn/focus-news/30473.html",
            "/focus-news/30500.html",
        ]
    );
}

#[test]
fn index_parser_falls_back_to_current_page_for_empty_segment() {
    let page = r#"
        <li class="list-details"><a href="/focus-news/1.html">n</a></li>
        <span class="current">3</span>
        <a class="extend" href="https://web.fosu.edu.cn/school-news/page/">last</a>
    "#;
    let meta = IndexParser::new(false).parse(page).expect("should parse");
    assert_eq!(meta.page, 3);
    assert_eq!(meta.last, 3);
}

#[test]
fn index_parser_reports_missing_page_marker() {
    let result = IndexParser::new(false).parse("<p>nothing here</p>");
    assert!(matches!(result, Err(Error::MissingElement(_))));
}

#[test]
fn news_parser_extracts_title_date_author_content() {
    let meta = NewsParser::new(false)
        .parse(NEWS_PAGE)
        .expect("news page should parse");
    assert_eq!(meta.title, "Campus opens new library");
    assert_eq!(meta.date, NaiveDate::from_ymd_opt(2021, 3, 12).expect("valid date"));
    assert_eq!(meta.author.as_deref(), Some("记者 张三"));
    assert_eq!(
        meta.content,
        "First paragraph.Second paragraph.Closing remarks."
    );
}

#[test]
fn news_parser_without_author_suffix() {
    let page = r#"
        <div class="content-title">
          <h1>Plain story</h1>
          <span class="vartime">date: 2022-11-05</span>
        </div>
        <div class="content-item">Body only, no byline.</div>
    "#;
    let meta = NewsParser::new(false).parse(page).expect("should parse");
    assert_eq!(meta.author, None);
    assert_eq!(meta.content, "Body only, no byline.");
    assert_eq!(meta.date, NaiveDate::from_ymd_opt(2022, 11, 5).expect("valid date"));
}

#[test]
fn news_parser_strict_mode_handles_unclosed_paragraphs() {
    // The body paragraphs never close; strict recovery splices them out but
    // keeps their text under the content container.
    let page = r#"
        <div class="content-title">
          <h1>Messy markup</h1>
          <span class="vartime">2020-01-31</span>
        </div>
        <div class="content-item"><p>one<p>two</div>
    "#;
    let meta = NewsParser::new(true).parse(page).expect("should parse");
    assert_eq!(meta.content, "onetwo");
}

#[test]
fn news_parser_missing_title_is_an_error() {
    let result = NewsParser::new(false).parse("<div class='content-item'>x</div>");
    assert!(matches!(result, Err(Error::MissingElement("news title"))));
}
