//! Voice-provider markup (TwiML) for the call webhooks

use quick_xml::escape::escape;

const GREETING: &str = "Welcome to OmniCall. Please wait while we connect you to an agent.";
const UNAVAILABLE: &str = "Sorry, the agent is not available. Please try again later.";

/// Dial `to` from the browser client, presenting `caller_id`
pub fn dial_number(caller_id: &str, to: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<Response>
    <Dial callerId="{}">
        <Number>{}</Number>
    </Dial>
</Response>"#,
        escape(caller_id),
        escape(to)
    )
}

/// Greet the caller and ring the agent's browser client
pub fn ring_agent(agent_id: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<Response>
    <Say>{}</Say>
    <Dial>
        <Client>{}</Client>
    </Dial>
    <Say>{}</Say>
</Response>"#,
        GREETING,
        escape(agent_id),
        UNAVAILABLE
    )
}
