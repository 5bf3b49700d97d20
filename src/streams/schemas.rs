//! JSON schemas of the Aircall resources
//!
//! Field lists follow the public API reference
//! (<https://developer.aircall.io/api-references/>). Nested resources reuse
//! the top-level schemas, so a call embeds full user, number and contact
//! objects.

use crate::schema::{JsonSchema, PropertiesList, SchemaProperty};

const DIRECT_LINK: &str = "Direct API URL.";

const USER_AVAILABILITY_STATUS: &str = "Current working status of the User. Can be available, \
     custom (= available according to their Working Hours and Timezone) or unavailable \
     (= Do Not Disturb or other unavailable status).";
const USER_TIME_ZONE: &str = "The User's timezone. This can be set either from the Dashboard \
     or the Phone. Default is Etc/UTC.";
const USER_LANGUAGE: &str = "The User's preferred language. This can be set either from the \
     Dashboard or the Phone. The format is IETF language tag. Default is en-US.";
const USER_WRAP_UP_TIME: &str = "A pre-set timer triggered after a call has ended, during \
     which the user can't receive any calls";

/// Summary of a user as embedded in a number
fn number_user() -> SchemaProperty {
    PropertiesList::new()
        .property("id", SchemaProperty::integer(), "Unique identifier for the User.")
        .property("direct_link", SchemaProperty::string(), DIRECT_LINK)
        .property(
            "name",
            SchemaProperty::string(),
            "Full name of the User. Results of first_name last_name.",
        )
        .property("email", SchemaProperty::string(), "Email of the User.")
        .property(
            "created_at",
            SchemaProperty::datetime(),
            "Timestamp when the User was created, in UTC.",
        )
        .property(
            "available",
            SchemaProperty::boolean(),
            "Current availability status of the User, based on their working hours.",
        )
        .property(
            "availability_status",
            SchemaProperty::string(),
            USER_AVAILABILITY_STATUS,
        )
        .property("time_zone", SchemaProperty::string(), USER_TIME_ZONE)
        .property("language", SchemaProperty::string(), USER_LANGUAGE)
        .property("wrap_up_time", SchemaProperty::integer(), USER_WRAP_UP_TIME)
        .into_object()
}

fn number_messages() -> SchemaProperty {
    PropertiesList::new()
        .property(
            "welcome",
            SchemaProperty::string(),
            "Welcome message URL. This file is played at the beginning of an incoming call.",
        )
        .property(
            "waiting",
            SchemaProperty::string(),
            "Waiting music URL. Caller will hear this if they are put on hold during an \
             ongoing call or while the call is being transfered.",
        )
        .property(
            "ringing_tone",
            SchemaProperty::string(),
            "Ringing tone URL. During an incoming call, caller will hear this music while \
             waiting for the call to be answered.",
        )
        .property(
            "unanswered_call",
            SchemaProperty::string(),
            "Unanswered Call message URL. Caller will hear this message if their call is not \
             answered when the business hours are open.",
        )
        .property(
            "after_hours",
            SchemaProperty::string(),
            "After Hours message URL. Caller will hear this message if they call outside of \
             this number's business hours.",
        )
        .property(
            "ivr",
            SchemaProperty::string(),
            "IVR message URL. Caller will hear this right after the Welcome message.",
        )
        .property(
            "voicemail",
            SchemaProperty::string(),
            "Voicemail message URL. Deprecated: replaced by unanswered_call.",
        )
        .property(
            "closed",
            SchemaProperty::string(),
            "Closed message URL. Deprecated: replaced by after_hours.",
        )
        .property(
            "callback_later",
            SchemaProperty::string(),
            "Callback Later message.",
        )
        .into_object()
}

/// Schema of a phone number
pub fn number_schema() -> JsonSchema {
    PropertiesList::new()
        .required("id", SchemaProperty::integer(), "Unique identifier for the Number.")
        .property("direct_link", SchemaProperty::string(), DIRECT_LINK)
        .property("name", SchemaProperty::string(), "The name of the Number.")
        .property(
            "digits",
            SchemaProperty::string(),
            "International format of the Number.",
        )
        .property(
            "created_at",
            SchemaProperty::datetime(),
            "Timestamp when the Number was created, in UTC.",
        )
        .property(
            "country",
            SchemaProperty::string(),
            "ISO 3166-1 alpha-2 country code of the Number.",
        )
        .property(
            "time_zone",
            SchemaProperty::string(),
            "Number's time zone, set in the Dashboard.",
        )
        .property(
            "open",
            SchemaProperty::boolean(),
            "Current opening state of the Number, based on its opening hours.",
        )
        .property(
            "availability_status",
            SchemaProperty::string(),
            "Current availability status of the Number. open, custom, closed",
        )
        .property(
            "is_ivr",
            SchemaProperty::boolean(),
            "true if Number is an IVR, false if Number is a Classic Number.",
        )
        .property(
            "live_recording_activated",
            SchemaProperty::boolean(),
            "Whether a Number has live recording activated or not.",
        )
        .property(
            "users",
            SchemaProperty::array(number_user()),
            "List of Users linked to this Number.",
        )
        .property(
            "priority",
            SchemaProperty::integer(),
            "Priority level of the number used during routing of the calls. Can be null, \
             0 (no priority) or 1 (top priority).",
        )
        .property(
            "messages",
            number_messages(),
            "URL to Number's music & messages files.",
        )
        .build()
}

/// Schema of a user
pub fn user_schema() -> JsonSchema {
    PropertiesList::new()
        .required("id", SchemaProperty::integer(), "Unique identifier for the User.")
        .property("direct_link", SchemaProperty::string(), DIRECT_LINK)
        .property(
            "name",
            SchemaProperty::string(),
            "Full name of the User. Results of first_name last_name.",
        )
        .property("email", SchemaProperty::email(), "Email of the User.")
        .property(
            "created_at",
            SchemaProperty::datetime(),
            "Timestamp when the User was created, in UTC.",
        )
        .property(
            "available",
            SchemaProperty::boolean(),
            "Current availability status of the User, based on their working hours.",
        )
        .property(
            "availability_status",
            SchemaProperty::string(),
            USER_AVAILABILITY_STATUS,
        )
        .property(
            "numbers",
            SchemaProperty::array(number_schema().into_property()),
            "List of Numbers associated to this User.",
        )
        .property("time_zone", SchemaProperty::string(), USER_TIME_ZONE)
        .property("language", SchemaProperty::string(), USER_LANGUAGE)
        .property("wrap_up_time", SchemaProperty::integer(), USER_WRAP_UP_TIME)
        .build()
}

/// Schema of a team
pub fn team_schema() -> JsonSchema {
    PropertiesList::new()
        .required("id", SchemaProperty::integer(), "Unique identifier for the Team.")
        .property("direct_link", SchemaProperty::string(), DIRECT_LINK)
        .property(
            "name",
            SchemaProperty::string(),
            "Full name of the Team. name must be unique in a company and 64 characters maximum.",
        )
        .property(
            "created_at",
            SchemaProperty::datetime(),
            "Timestamp when the Team was created, in UTC.",
        )
        .property(
            "users",
            SchemaProperty::array(user_schema().into_property()),
            "List of Users associated to this Team.",
        )
        .build()
}

fn labelled_value(id_description: &str, value_description: &str) -> SchemaProperty {
    PropertiesList::new()
        .property("id", SchemaProperty::integer(), id_description)
        .property(
            "label",
            SchemaProperty::string(),
            "A custom label like work, home...",
        )
        .property("value", SchemaProperty::string(), value_description)
        .into_object()
}

/// Schema of a shared contact
pub fn contact_schema() -> JsonSchema {
    PropertiesList::new()
        .required("id", SchemaProperty::integer(), "Unique identifier for the Contact.")
        .property("direct_link", SchemaProperty::string(), DIRECT_LINK)
        .property("first_name", SchemaProperty::string(), "Contact's first name.")
        .property("last_name", SchemaProperty::string(), "Contact's last name.")
        .property("company_name", SchemaProperty::string(), "Contact's company name.")
        .property(
            "description",
            SchemaProperty::string(),
            "Field used by Aircall to qualify tags.",
        )
        .property(
            "information",
            SchemaProperty::string(),
            "Extra information about the contact.",
        )
        .property(
            "is_shared",
            SchemaProperty::boolean(),
            "Contact can be shared within the organization.",
        )
        .property(
            "created_at",
            SchemaProperty::datetime(),
            "Timestamp when the Contact was created, in UTC.",
        )
        .property(
            "phone_numbers",
            SchemaProperty::array(labelled_value(
                "Unique identifier for this phone number.",
                "The raw phone number.",
            )),
            "Phone numbers of this contact.",
        )
        .property(
            "emails",
            SchemaProperty::array(labelled_value(
                "Unique identifier for this email address.",
                "The email address.",
            )),
            "Email addresses of this contact.",
        )
        .build()
}

/// Schema of a tag
pub fn tag_schema() -> JsonSchema {
    PropertiesList::new()
        .required("id", SchemaProperty::integer(), "Unique identifier for the Tag.")
        .property("direct_link", SchemaProperty::string(), DIRECT_LINK)
        .property("name", SchemaProperty::string(), "Tag's name.")
        .property(
            "color",
            SchemaProperty::string(),
            "The color that this tag is displayed in. In Hexadecimal format.",
        )
        .property(
            "description",
            SchemaProperty::string(),
            "Field used by Aircall to qualify Tags.",
        )
        .build()
}

fn call_comment() -> SchemaProperty {
    PropertiesList::new()
        .property("id", SchemaProperty::integer(), "Unique identifier for the Comment.")
        .property(
            "content",
            SchemaProperty::string(),
            "Content of the Comment, written by Agent or via Public API.",
        )
        .property(
            "posted_at",
            SchemaProperty::integer(),
            "UNIX timestamp when the Comment was created, in UTC.",
        )
        .property(
            "posted_by",
            user_schema().into_property(),
            "User object who created the Comment.",
        )
        .into_object()
}

fn call_participant() -> SchemaProperty {
    PropertiesList::new()
        .property(
            "id",
            SchemaProperty::string(),
            "Either Contact or User id. Not present for external",
        )
        .property(
            "type",
            SchemaProperty::string(),
            "It will be 'user', 'contact' or 'external'",
        )
        .property(
            "name",
            SchemaProperty::string(),
            "Participant's full name. Not present for external",
        )
        .property(
            "phone_number",
            SchemaProperty::string(),
            "Not present in a user type participant",
        )
        .into_object()
}

/// Schema of a call
pub fn call_schema() -> JsonSchema {
    PropertiesList::new()
        .required("id", SchemaProperty::integer(), "Unique identifier for the Call.")
        .property("direct_link", SchemaProperty::string(), DIRECT_LINK)
        .property(
            "started_at",
            SchemaProperty::datetime(),
            "Timestamp when the Call started, in UTC.",
        )
        .property(
            "answered_at",
            SchemaProperty::datetime(),
            "Timestamp when the Call has been answered, in UTC.",
        )
        .property(
            "ended_at",
            SchemaProperty::datetime(),
            "Timestamp when the Call ended, in UTC.",
        )
        .property(
            "duration",
            SchemaProperty::integer(),
            "Duration of the Call in seconds.",
        )
        .property(
            "status",
            SchemaProperty::string(),
            "Current status of the Call. Can be initial, answered or done.",
        )
        .property(
            "direction",
            SchemaProperty::string(),
            "Direction of the Call. Could be inbound or outbound.",
        )
        .property(
            "raw_digits",
            SchemaProperty::string(),
            "International format of the number of the caller or the callee. For an \
             anonymous call, the value is anonymous.",
        )
        .property(
            "asset",
            SchemaProperty::string(),
            "If present, a secured webpage containing the voicemail or live recording for \
             this Call.",
        )
        .property(
            "recording",
            SchemaProperty::string(),
            "If present, the direct URL of the live recording (mp3 file) for this Call. \
             This link is valid for 10min. only.",
        )
        .property(
            "voicemail",
            SchemaProperty::string(),
            "Only present if a voicemail was left. The direct URL of the voicemail (mp3 \
             file). This link is valid for 10min. only.",
        )
        .property(
            "archived",
            SchemaProperty::boolean(),
            "Describe if Call needs follow up.",
        )
        .property(
            "missed_call_reason",
            SchemaProperty::string(),
            "Representing the reason why the Call was missed. Can be out_of_opening_hours, \
             short_abandoned, abandoned_in_ivr, abandoned_in_classic, no_available_agent or \
             agents_did_not_answer.",
        )
        .property("cost", SchemaProperty::string(), "Cost of the Call in U.S. cents.")
        .property(
            "number",
            number_schema().into_property(),
            "Full Number object attached to the Call.",
        )
        .property(
            "user",
            user_schema().into_property(),
            "Full User object who took or made the Call.",
        )
        .property(
            "contact",
            contact_schema().into_property(),
            "Full Contact object attached to the Call.",
        )
        .property(
            "assigned_to",
            user_schema().into_property(),
            "Full User object assigned to the Call.",
        )
        .property(
            "teams",
            SchemaProperty::array(team_schema().into_property()),
            "Full Teams object assigned to the Call. Teams are only assigned to inbound calls.",
        )
        .property(
            "transferred_by",
            user_schema().into_property(),
            "User who performed the Call transfer.",
        )
        .property(
            "transferred_to",
            user_schema().into_property(),
            "User to whom the Call was transferred to.",
        )
        .undocumented("comments", SchemaProperty::array(call_comment()))
        .property(
            "tags",
            SchemaProperty::array(tag_schema().into_property()),
            "Tags added to this Call by Users.",
        )
        .property(
            "participants",
            SchemaProperty::array(call_participant()),
            "Participants involved in a conference call.",
        )
        .build()
}
