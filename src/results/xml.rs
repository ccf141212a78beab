//! Streaming decoder for the SPARQL Query Results XML Format

use super::QueryResult;
use crate::error::{SparqlError, SparqlResult};
use crate::iri::{Iri, IriRef};
use crate::term::{Literal, Solution, Term};
use async_trait::async_trait;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tokio::io::AsyncBufRead;
use tracing::debug;

/// An owned element start tag
#[derive(Debug)]
struct Element {
    name: String,
    attributes: Vec<(String, String)>,
}

impl Element {
    fn from_start(start: &BytesStart<'_>) -> SparqlResult<Self> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            attributes.push((key, value));
        }
        Ok(Self { name, attributes })
    }

    /// Attribute by local name, ignoring any prefix
    fn attribute(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.rsplit(':').next() == Some(local))
            .map(|(_, value)| value.as_str())
    }

    /// Attribute by its exact qualified name
    fn qualified_attribute(&self, qualified: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == qualified)
            .map(|(_, value)| value.as_str())
    }
}

/// The subset of XML events the decoder reacts to, detached from the read buffer
#[derive(Debug)]
enum Token {
    Start(Element),
    Empty(Element),
    End(String),
    Text(String),
    Eof,
}

async fn read_token<R: AsyncBufRead + Unpin>(
    reader: &mut Reader<R>,
    buffer: &mut Vec<u8>,
) -> SparqlResult<Token> {
    loop {
        buffer.clear();
        let token = match reader.read_event_into_async(buffer).await? {
            Event::Start(start) => Token::Start(Element::from_start(&start)?),
            Event::Empty(start) => Token::Empty(Element::from_start(&start)?),
            Event::End(end) => {
                Token::End(String::from_utf8_lossy(end.local_name().as_ref()).into_owned())
            }
            Event::Text(text) => Token::Text(text.unescape()?.into_owned()),
            Event::CData(data) => Token::Text(String::from_utf8_lossy(&data).into_owned()),
            Event::Eof => Token::Eof,
            _ => continue,
        };
        return Ok(token);
    }
}

/// Collect the text content of the element named `name` up to its end tag
async fn read_text<R: AsyncBufRead + Unpin>(
    reader: &mut Reader<R>,
    buffer: &mut Vec<u8>,
    name: &'static str,
) -> SparqlResult<String> {
    let mut text = String::new();
    loop {
        match read_token(reader, buffer).await? {
            Token::Text(t) => text.push_str(&t),
            Token::End(end) if end == name => return Ok(text),
            Token::Start(e) | Token::Empty(e) => {
                return Err(SparqlError::Decode(format!(
                    "unexpected <{}> inside <{}>",
                    e.name, name
                )))
            }
            Token::End(end) => {
                return Err(SparqlError::Decode(format!(
                    "unexpected </{}> inside <{}>",
                    end, name
                )))
            }
            Token::Eof => return Err(SparqlError::UnexpectedEof(name)),
        }
    }
}

async fn read_head<R: AsyncBufRead + Unpin>(
    reader: &mut Reader<R>,
    buffer: &mut Vec<u8>,
) -> SparqlResult<Vec<String>> {
    loop {
        match read_token(reader, buffer).await? {
            Token::Start(e) if e.name == "head" => break,
            Token::Empty(e) if e.name == "head" => return Ok(Vec::new()),
            Token::Eof => return Err(SparqlError::UnexpectedEof("head")),
            _ => {}
        }
    }

    let mut variables = Vec::new();
    loop {
        match read_token(reader, buffer).await? {
            Token::Start(e) | Token::Empty(e) if e.name == "variable" => {
                let name = e.attribute("name").ok_or_else(|| {
                    SparqlError::Decode("<variable> without a name attribute".to_string())
                })?;
                variables.push(name.to_string());
            }
            Token::End(end) if end == "head" => return Ok(variables),
            Token::Eof => return Err(SparqlError::UnexpectedEof("head")),
            _ => {}
        }
    }
}

/// Decode the single value element inside a `<binding>`
async fn read_binding_value<R: AsyncBufRead + Unpin>(
    reader: &mut Reader<R>,
    buffer: &mut Vec<u8>,
) -> SparqlResult<Term> {
    loop {
        let (element, empty) = match read_token(reader, buffer).await? {
            Token::Start(e) => (e, false),
            Token::Empty(e) => (e, true),
            Token::Text(_) => continue,
            Token::End(_) => {
                return Err(SparqlError::Decode("<binding> without a value".to_string()))
            }
            Token::Eof => return Err(SparqlError::UnexpectedEof("binding")),
        };

        return match element.name.as_str() {
            "uri" => {
                let text = if empty {
                    String::new()
                } else {
                    read_text(reader, buffer, "uri").await?
                };
                Ok(Term::Iri(Iri::new(text)))
            }
            "literal" => {
                let data_type = element
                    .attribute("datatype")
                    .map(|dt| IriRef::Iri(Iri::new(dt)));
                let language_tag = element.qualified_attribute("xml:lang").map(str::to_string);
                let value = if empty {
                    String::new()
                } else {
                    read_text(reader, buffer, "literal").await?
                };
                Ok(Term::Literal(Literal {
                    value,
                    data_type,
                    language_tag,
                }))
            }
            "bnode" => {
                let text = if empty {
                    String::new()
                } else {
                    read_text(reader, buffer, "bnode").await?
                };
                Ok(Term::BlankNode(text))
            }
            other => Err(SparqlError::UnknownBinding(other.to_string())),
        };
    }
}

/// Decode one `<result>` whose start tag was just consumed
async fn read_result<R: AsyncBufRead + Unpin>(
    reader: &mut Reader<R>,
    buffer: &mut Vec<u8>,
    size: usize,
) -> SparqlResult<Solution> {
    let mut bindings = Solution::with_capacity(size);
    loop {
        match read_token(reader, buffer).await? {
            Token::Start(e) if e.name == "binding" => {
                let name = e.attribute("name").unwrap_or_default().to_string();
                let term = read_binding_value(reader, buffer).await?;
                bindings.insert(name, term);
            }
            Token::End(end) if end == "result" => return Ok(bindings),
            Token::Eof => return Err(SparqlError::UnexpectedEof("result")),
            _ => {}
        }
    }
}

/// Forward-only reader over an XML results document
pub struct XmlQueryResult<R> {
    reader: Option<Reader<R>>,
    buffer: Vec<u8>,
    variables: Vec<String>,
    failed: bool,
}

impl<R: AsyncBufRead + Unpin + Send> XmlQueryResult<R> {
    /// Read up to the end of `<head>` and collect the declared variables
    pub async fn decode(read: R) -> SparqlResult<Self> {
        let mut reader = Reader::from_reader(read);
        let mut buffer = Vec::with_capacity(256);
        let variables = read_head(&mut reader, &mut buffer).await?;
        debug!(?variables, "Decoded XML result head");
        Ok(Self {
            reader: Some(reader),
            buffer,
            variables,
            failed: false,
        })
    }

    fn reader(&mut self) -> SparqlResult<(&mut Reader<R>, &mut Vec<u8>)> {
        match self.reader.as_mut() {
            Some(_) if self.failed => Err(SparqlError::ResultFailed),
            Some(reader) => Ok((reader, &mut self.buffer)),
            None => Err(SparqlError::ResultClosed),
        }
    }

    async fn read_next(&mut self) -> SparqlResult<Option<Solution>> {
        let size = self.variables.len();
        let (reader, buffer) = self.reader()?;
        loop {
            match read_token(reader, buffer).await? {
                Token::Start(e) if e.name == "result" => {
                    return read_result(reader, buffer, size).await.map(Some)
                }
                Token::Empty(e) if e.name == "result" => return Ok(Some(Solution::new())),
                Token::Eof => return Ok(None),
                _ => {}
            }
        }
    }

    async fn read_boolean(&mut self) -> SparqlResult<bool> {
        let (reader, buffer) = self.reader()?;
        loop {
            match read_token(reader, buffer).await? {
                Token::Start(e) if e.name == "boolean" => break,
                Token::Eof => return Err(SparqlError::UnexpectedEof("boolean")),
                _ => {}
            }
        }
        let text = read_text(reader, buffer, "boolean").await?;
        match text.trim() {
            "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
            "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
            other => Err(SparqlError::Decode(format!(
                "unexpected boolean value '{}'",
                other
            ))),
        }
    }

    /// The reader position is unknown after an error; later reads refuse
    fn poison_on_error<T>(&mut self, outcome: SparqlResult<T>) -> SparqlResult<T> {
        if outcome.is_err() && self.reader.is_some() {
            self.failed = true;
        }
        outcome
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> QueryResult for XmlQueryResult<R> {
    fn variables(&self) -> &[String] {
        &self.variables
    }

    async fn next(&mut self) -> SparqlResult<Option<Solution>> {
        let outcome = self.read_next().await;
        self.poison_on_error(outcome)
    }

    async fn boolean(&mut self) -> SparqlResult<bool> {
        let outcome = self.read_boolean().await;
        self.poison_on_error(outcome)
    }

    fn close(&mut self) -> SparqlResult<()> {
        match self.reader.take() {
            Some(_) => Ok(()),
            None => Err(SparqlError::ResultClosed),
        }
    }
}
