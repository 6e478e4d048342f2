use crate::domain::model::MessageRecord;

/// `AT+CMGL` 回應中每則簡訊標頭行的前綴
pub const LIST_MARKER: &str = "+CMGL";

/// 將一次輪詢的數據機回應切成 (標頭, 內容) 配對。
///
/// 回應中沒有 `+CMGL` 時代表沒有簡訊，回傳空集合。
/// 標頭行的下一行（去除前後空白）即為該簡訊內容；
/// 位於最後一行、沒有內容行的標頭會被略過。
pub fn split_response(raw: &str) -> Vec<MessageRecord> {
    if !raw.contains(LIST_MARKER) {
        return Vec::new();
    }

    let lines: Vec<&str> = raw.lines().collect();
    let mut records = Vec::new();

    for (index, line) in lines.iter().enumerate() {
        if !line.starts_with(LIST_MARKER) {
            continue;
        }

        match lines.get(index + 1) {
            Some(next) => records.push(MessageRecord {
                header: line.to_string(),
                body: next.trim().to_string(),
            }),
            None => {
                tracing::debug!("Dropping header without body line: {}", line);
            }
        }
    }

    records
}
